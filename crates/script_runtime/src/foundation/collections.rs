//! Specialized collection types and algorithms

pub use slotmap::{Key, SlotMap};

/// Stable-sorts `items` in place by the key returned from `key`.
///
/// Items with equal keys keep their relative order. Keys are computed once per
/// item and the items are reordered through an index permutation, so `T` only
/// needs to be `Clone`. This is a top-down merge sort with a single scratch
/// buffer; O(n log n) comparisons and a linear fast path for input that is
/// already sorted.
pub fn stable_sort_by_key<T, K, F>(items: &mut [T], mut key: F)
where
    T: Clone,
    K: Ord,
    F: FnMut(&T) -> K,
{
    let len = items.len();
    if len < 2 {
        return;
    }

    let keys: Vec<K> = items.iter().map(&mut key).collect();
    if keys.windows(2).all(|pair| pair[0] <= pair[1]) {
        return;
    }

    let mut order: Vec<usize> = (0..len).collect();
    let mut scratch = vec![0usize; len];
    merge_sort(&mut order, &mut scratch, &keys);

    let sorted: Vec<T> = order.iter().map(|&index| items[index].clone()).collect();
    items.clone_from_slice(&sorted);
}

fn merge_sort<K: Ord>(order: &mut [usize], scratch: &mut [usize], keys: &[K]) {
    let len = order.len();
    if len < 2 {
        return;
    }

    let mid = len / 2;
    merge_sort(&mut order[..mid], &mut scratch[..mid], keys);
    merge_sort(&mut order[mid..], &mut scratch[mid..], keys);

    // Halves already in order relative to each other
    if keys[order[mid - 1]] <= keys[order[mid]] {
        return;
    }

    scratch.copy_from_slice(order);
    let (left, right) = scratch.split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in order.iter_mut() {
        // `<=` takes from the left run on ties, which is what keeps the sort stable
        let take_left = j >= right.len() || (i < left.len() && keys[left[i]] <= keys[right[j]]);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}

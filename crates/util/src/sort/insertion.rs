use std::cmp::Ordering;

/// Insertion sort with a custom comparator.
///
/// Stable: elements that compare equal keep their relative order.
///
/// # Examples
///
/// ```
/// use formtree_util::sort::insertion_sort_by;
///
/// let mut arr = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
/// insertion_sort_by(&mut arr, |a, b| a.0.cmp(&b.0));
/// assert_eq!(arr, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
/// ```
pub fn insertion_sort_by<T, F>(arr: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = arr.len();
    for i in 1..len {
        let mut j = i;
        while j > 0 && compare(&arr[j - 1], &arr[j]) == Ordering::Greater {
            arr.swap(j - 1, j);
            j -= 1;
        }
    }
}

//! Order-preserving batch partitioning.

/// Split `items` into `ceil(n / batch_size)` batches. Every batch has
/// exactly `batch_size` elements except possibly the last, each input
/// element appears exactly once, and original order is preserved.
///
/// `batch_size` is validated at the settings layer; zero here is a bug.
pub fn partition<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    assert!(batch_size > 0, "batch size must be positive");
    items
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_gives_uniform_batches() {
        let items: Vec<u32> = (0..20).collect();
        let batches = partition(&items, 5);
        assert_eq!(batches.len(), 4);
        assert!(batches.iter().all(|b| b.len() == 5));
    }

    #[test]
    fn remainder_lands_in_a_short_final_batch() {
        let items: Vec<u32> = (0..22).collect();
        let batches = partition(&items, 5);
        assert_eq!(batches.len(), 5);
        assert_eq!(batches[4], vec![20, 21]);
    }

    #[test]
    fn order_and_coverage_are_preserved() {
        let items: Vec<u32> = (0..13).collect();
        let flattened: Vec<u32> = partition(&items, 4).into_iter().flatten().collect();
        assert_eq!(flattened, items);
    }

    #[test]
    fn fewer_items_than_batch_size_is_one_batch() {
        let items = vec!["a", "b"];
        let batches = partition(&items, 10);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec!["a", "b"]);
    }

    #[test]
    fn empty_input_gives_no_batches() {
        let items: Vec<u32> = vec![];
        assert!(partition(&items, 5).is_empty());
    }
}

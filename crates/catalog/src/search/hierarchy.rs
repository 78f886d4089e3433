//! Store location closure.

use std::collections::{HashSet, VecDeque};

use crate::core::LocationHierarchy;
use crate::error::CatalogResult;

/// Returns `roots` and all their descendants, breadth first.
///
/// Each location appears once; cycles in the hierarchy are tolerated.
pub async fn descendant_closure<H>(hierarchy: &H, roots: &[i64]) -> CatalogResult<Vec<i64>>
where
    H: LocationHierarchy + ?Sized,
{
    let mut seen: HashSet<i64> = HashSet::new();
    let mut closure = Vec::new();
    let mut queue: VecDeque<i64> = VecDeque::new();

    for &root in roots {
        if seen.insert(root) {
            closure.push(root);
            queue.push_back(root);
        }
    }

    while let Some(location) = queue.pop_front() {
        for child in hierarchy.children_of(location).await? {
            if seen.insert(child) {
                closure.push(child);
                queue.push_back(child);
            }
        }
    }

    Ok(closure)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    struct Tree(HashMap<i64, Vec<i64>>);

    #[async_trait]
    impl LocationHierarchy for Tree {
        async fn children_of(&self, location_id: i64) -> CatalogResult<Vec<i64>> {
            Ok(self.0.get(&location_id).cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_breadth_first_closure() {
        let tree = Tree(HashMap::from([(1, vec![2, 3]), (2, vec![4]), (3, vec![5])]));
        let closure = descendant_closure(&tree, &[1]).await.unwrap();
        assert_eq!(closure, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let tree = Tree(HashMap::from([(1, vec![2]), (2, vec![3]), (3, vec![1])]));
        let closure = descendant_closure(&tree, &[2]).await.unwrap();
        assert_eq!(closure, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_overlapping_roots() {
        let tree = Tree(HashMap::from([(1, vec![2]), (2, vec![3])]));
        let closure = descendant_closure(&tree, &[2, 1]).await.unwrap();
        assert_eq!(closure, vec![2, 1, 3]);
    }
}

//! Selection types

use serde::{Deserialize, Serialize};

/// Position of a word in a recognition result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementIndex {
    pub block: usize,
    pub line: usize,
    pub element: usize,
}

impl ElementIndex {
    pub fn new(block: usize, line: usize, element: usize) -> Self {
        Self {
            block,
            line,
            element,
        }
    }
}

/// Words picked by a lasso and the text they form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    /// Selected words in reading order
    pub selected_elements: Vec<ElementIndex>,
    /// Selected words joined by spaces; `None` when nothing was selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.selected_elements.is_empty()
    }

    pub fn contains(&self, index: &ElementIndex) -> bool {
        self.selected_elements.binary_search(index).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_index_orders_by_block_line_element() {
        let mut indices = vec![
            ElementIndex::new(1, 0, 0),
            ElementIndex::new(0, 2, 0),
            ElementIndex::new(0, 0, 3),
            ElementIndex::new(0, 2, 1),
        ];
        indices.sort();
        assert_eq!(
            indices,
            vec![
                ElementIndex::new(0, 0, 3),
                ElementIndex::new(0, 2, 0),
                ElementIndex::new(0, 2, 1),
                ElementIndex::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn test_contains() {
        let selection = SelectionResult {
            selected_elements: vec![ElementIndex::new(0, 0, 1), ElementIndex::new(0, 1, 0)],
            selected_text: Some("b c".to_string()),
        };
        assert!(selection.contains(&ElementIndex::new(0, 1, 0)));
        assert!(!selection.contains(&ElementIndex::new(0, 0, 0)));
        assert!(SelectionResult::default().is_empty());
    }
}

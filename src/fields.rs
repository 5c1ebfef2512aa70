use std::collections::HashMap;

use crate::metadata::BoundingBox;

/// Identifier of the input widget bound to a box's extracted text.
pub fn input_field_id(element_id: &str) -> String {
    format!("input-{element_id}")
}

/// One editable text field, joined to its bounding box by `element_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    pub element_id: String,
    pub input_id: String,
    pub text: String,
}

/// Explicit element-id → field mapping for one load cycle, populated when
/// the fields are created. Keeps focus resolution out of any global
/// namespace lookup.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<TextField>,
    index: HashMap<String, usize>,
    focused: Option<usize>,
}

impl FieldRegistry {
    pub fn from_boxes(boxes: &[BoundingBox]) -> Self {
        let mut registry = Self::default();
        for bounding_box in boxes {
            registry.index.insert(bounding_box.element_id.clone(), registry.fields.len());
            registry.fields.push(TextField {
                element_id: bounding_box.element_id.clone(),
                input_id: input_field_id(&bounding_box.element_id),
                text: bounding_box.text.clone(),
            });
        }
        registry
    }

    /// Fields in server response order.
    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Move focus to the field joined to `element_id`. Focusing an unknown
    /// field is a logged no-op, not an error.
    pub fn focus(&mut self, element_id: &str) -> Option<&TextField> {
        match self.index.get(element_id) {
            Some(&i) => {
                self.focused = Some(i);
                log::debug!("Focused field {}", self.fields[i].input_id);
                Some(&self.fields[i])
            }
            None => {
                log::warn!("No input field for element {}", element_id);
                None
            }
        }
    }

    pub fn focused(&self) -> Option<&TextField> {
        self.focused.map(|i| &self.fields[i])
    }

    /// Replace a field's text (user-edit seam). Returns false for an unknown
    /// element.
    pub fn set_text(&mut self, element_id: &str, text: impl Into<String>) -> bool {
        match self.index.get(element_id) {
            Some(&i) => {
                self.fields[i].text = text.into();
                true
            }
            None => false,
        }
    }
}

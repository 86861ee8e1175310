use crate::error::ModelLoadError;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn new(names: Vec<String>) -> Result<Self, ModelLoadError> {
        let table = Self { names };
        if table.is_empty() {
            return Err(ModelLoadError::EmptyLabels);
        }
        Ok(table)
    }

    pub fn from_json(data: &[u8]) -> Result<Self, ModelLoadError> {
        let names: Vec<String> = serde_json::from_slice(data)?;
        Self::new(names)
    }

    pub fn get(&self, class_index: usize) -> Option<&str> {
        self.names.get(class_index).map(String::as_str)
    }

    pub fn name_or_unknown(&self, class_index: usize) -> String {
        match self.get(class_index) {
            Some(name) => name.to_string(),
            None => format!("Unknown class {}", class_index),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Index<usize> for LabelTable {
    type Output = str;

    fn index(&self, class_index: usize) -> &str {
        &self.names[class_index]
    }
}

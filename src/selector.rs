//! The five RFC 9535 selectors: name, index, wildcard, slice, and filter.

use std::fmt;

use serde_json::Value;

use crate::environment::Environment;
use crate::filter::Filter;
use crate::location::canonical_string;
use crate::node::Node;

/// A single selector, as it appears inside a segment's bracketed list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Name(String),
    Index(i64),
    Wildcard,
    Slice(Slice),
    Filter(Filter),
}

impl Selector {
    /// True for the two selectors that can only ever select a single node.
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::Name(_) | Self::Index(_))
    }

    pub(crate) fn apply<'a>(
        &self,
        node: &Node<'a>,
        root: &'a Value,
        env: &Environment,
    ) -> Vec<Node<'a>> {
        match self {
            Self::Name(name) => node
                .value()
                .as_object()
                .and_then(|obj| obj.get(name))
                .map(|v| vec![node.new_child(v, name.as_str())])
                .unwrap_or_default(),
            Self::Index(index) => node
                .value()
                .as_array()
                .and_then(|arr| resolve_index(*index, arr.len()))
                .and_then(|i| node.value().as_array().unwrap().get(i).map(|v| (i, v)))
                .map(|(i, v)| vec![node.new_child(v, i)])
                .unwrap_or_default(),
            Self::Wildcard => match node.value() {
                Value::Array(arr) => arr
                    .iter()
                    .enumerate()
                    .map(|(i, v)| node.new_child(v, i))
                    .collect(),
                Value::Object(obj) => env
                    .object_entries(obj)
                    .into_iter()
                    .map(|(k, v)| node.new_child(v, k))
                    .collect(),
                _ => Vec::new(),
            },
            Self::Slice(slice) => match node.value().as_array() {
                Some(arr) => slice
                    .indices(arr.len())
                    .filter_map(|i| arr.get(i).map(|v| node.new_child(v, i)))
                    .collect(),
                None => Vec::new(),
            },
            Self::Filter(filter) => match node.value() {
                Value::Array(arr) => arr
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| filter.test(v, root, env))
                    .map(|(i, v)| node.new_child(v, i))
                    .collect(),
                Value::Object(obj) => env
                    .object_entries(obj)
                    .into_iter()
                    .filter(|(_, v)| filter.test(v, root, env))
                    .map(|(k, v)| node.new_child(v, k))
                    .collect(),
                _ => Vec::new(),
            },
        }
    }
}

pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        let i = index as usize;
        (i < len).then_some(i)
    } else {
        let offset = index.checked_neg()?;
        let offset = usize::try_from(offset).ok()?;
        len.checked_sub(offset)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", canonical_string(name)),
            Self::Index(index) => write!(f, "{index}"),
            Self::Wildcard => write!(f, "*"),
            Self::Slice(slice) => write!(f, "{slice}"),
            Self::Filter(filter) => write!(f, "?{filter}"),
        }
    }
}

/// A `start:end:step` array slice selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Yields the array indices selected by this slice against an array of
    /// the given length, in selection order, per the normalization rules
    /// of RFC 9535 §2.3.4.2.2.
    pub(crate) fn indices(&self, len: usize) -> SliceIndices {
        let len = len as i64;
        let step = self.step.unwrap_or(1);
        let (lower, upper) = if step == 0 {
            (0, 0)
        } else if step > 0 {
            let start = self.start.map(|s| normalize(s, len)).unwrap_or(0).clamp(0, len);
            let end = self.end.map(|s| normalize(s, len)).unwrap_or(len).clamp(0, len);
            (start, end)
        } else {
            let start = self
                .start
                .map(|s| normalize(s, len))
                .unwrap_or(len - 1)
                .clamp(-1, len - 1);
            let end = self
                .end
                .map(|s| normalize(s, len))
                .unwrap_or(-1)
                .clamp(-1, len - 1);
            (end, start)
        };
        SliceIndices {
            current: if step > 0 { lower } else { upper },
            upper: if step > 0 { upper } else { lower },
            step,
            forward: step > 0,
        }
    }
}

fn normalize(index: i64, len: i64) -> i64 {
    if index >= 0 {
        index
    } else {
        len + index
    }
}

pub(crate) struct SliceIndices {
    current: i64,
    upper: i64,
    step: i64,
    forward: bool,
}

impl Iterator for SliceIndices {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step == 0 {
            return None;
        }
        if self.forward {
            if self.current >= self.upper {
                return None;
            }
            let i = self.current;
            self.current += self.step;
            Some(i as usize)
        } else {
            if self.current <= self.upper {
                return None;
            }
            let i = self.current;
            self.current += self.step;
            Some(i as usize)
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(slice: Slice, len: usize) -> Vec<usize> {
        slice.indices(len).collect()
    }

    #[test]
    fn forward_default() {
        assert_eq!(collect(Slice::new(), 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn forward_with_step() {
        assert_eq!(
            collect(Slice::new().with_start(1).with_end(5).with_step(2), 5),
            vec![1, 3]
        );
    }

    #[test]
    fn negative_step_reverses() {
        assert_eq!(
            collect(Slice::new().with_step(-1), 5),
            vec![4, 3, 2, 1, 0]
        );
    }

    #[test]
    fn negative_start_end() {
        assert_eq!(
            collect(Slice::new().with_start(-2).with_end(-1), 5),
            vec![3]
        );
    }

    #[test]
    fn zero_step_yields_nothing() {
        assert_eq!(collect(Slice::new().with_step(0), 5), Vec::<usize>::new());
    }

    #[test]
    fn index_resolution() {
        assert_eq!(resolve_index(0, 3), Some(0));
        assert_eq!(resolve_index(2, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(-4, 3), None);
    }
}

//! Frame properties propagated along the filter chain

use crate::util::{Rational, Timestamp};
use std::collections::BTreeMap;
use std::fmt;

/// Field order of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Progressive,
    BottomFieldFirst,
    TopFieldFirst,
}

/// Picture type (I, P, B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PictureType {
    I,
    P,
    B,
    #[default]
    None,
}

impl fmt::Display for PictureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PictureType::I => write!(f, "I"),
            PictureType::P => write!(f, "P"),
            PictureType::B => write!(f, "B"),
            PictureType::None => write!(f, "?"),
        }
    }
}

/// Value of a free-form frame property
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Int(i64),
    Float(f64),
    Data(String),
}

/// Metadata attached to every frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameProps {
    /// Presentation timestamp
    pub pts: Timestamp,
    /// Frame duration in seconds
    pub duration: Rational,
    pub field_order: FieldOrder,
    pub pict_type: PictureType,
    pub keyframe: bool,
    /// Properties set by upstream filters that this crate does not interpret
    pub extra: BTreeMap<String, PropValue>,
}

impl FrameProps {
    pub fn set(&mut self, key: impl Into<String>, value: PropValue) {
        self.extra.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_props() {
        let props = FrameProps::default();
        assert!(!props.pts.is_valid());
        assert_eq!(props.field_order, FieldOrder::Progressive);
        assert_eq!(props.pict_type.to_string(), "?");
    }

    #[test]
    fn test_extra_props() {
        let mut props = FrameProps::default();
        props.set("_SceneChangeNext", PropValue::Int(1));
        assert_eq!(props.get("_SceneChangeNext"), Some(&PropValue::Int(1)));
        assert_eq!(props.get("_Combed"), None);
    }
}

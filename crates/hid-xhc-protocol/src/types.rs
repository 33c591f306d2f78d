//! WHB04B device model classification.

use crate::ids::product_ids;

/// WHB04B pendant model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum XhcModel {
    /// Four axis variant (X, Y, Z, A).
    Whb04b4,
    /// Six axis variant (X, Y, Z, A, B, C).
    Whb04b6,
    /// Unknown receiver.
    Unknown,
}

impl XhcModel {
    /// Classify a receiver by its product ID.
    pub fn from_product_id(product_id: u16) -> Self {
        match product_id {
            product_ids::WHB04B_4 => Self::Whb04b4,
            product_ids::WHB04B_6 => Self::Whb04b6,
            _ => Self::Unknown,
        }
    }

    /// Number of axes the axis selector dial can address.
    pub fn axis_count(self) -> u8 {
        match self {
            Self::Whb04b4 => 4,
            Self::Whb04b6 => 6,
            Self::Unknown => 0,
        }
    }

    /// Human readable model name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Whb04b4 => "WHB04B-4",
            Self::Whb04b6 => "WHB04B-6",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` if this is a known model.
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_product_id() {
        assert_eq!(XhcModel::from_product_id(0xEB93), XhcModel::Whb04b6);
        assert_eq!(XhcModel::from_product_id(0xEB70), XhcModel::Whb04b4);
        assert_eq!(XhcModel::from_product_id(0xFFFF), XhcModel::Unknown);
    }

    #[test]
    fn test_axis_count() {
        assert_eq!(XhcModel::Whb04b6.axis_count(), 6);
        assert_eq!(XhcModel::Whb04b4.axis_count(), 4);
        assert!(!XhcModel::Unknown.is_known());
    }
}

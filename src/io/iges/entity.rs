use super::model::EntityId;

/// IGES entity types produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    CompositeCurve,
    Plane,
    Line,
    Point,
    RuledSurface,
    SurfaceOfRevolution,
    RationalBSplineCurve,
    RationalBSplineSurface,
    Boundary,
    CurveOnSurface,
    BoundedSurface,
    TrimmedSurface,
}

impl EntityType {
    /// Numeric entity type code.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::CompositeCurve => 102,
            Self::Plane => 108,
            Self::Line => 110,
            Self::Point => 116,
            Self::RuledSurface => 118,
            Self::SurfaceOfRevolution => 120,
            Self::RationalBSplineCurve => 126,
            Self::RationalBSplineSurface => 128,
            Self::Boundary => 141,
            Self::CurveOnSurface => 142,
            Self::BoundedSurface => 143,
            Self::TrimmedSurface => 144,
        }
    }

    /// Looks up a type by its numeric code.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            102 => Self::CompositeCurve,
            108 => Self::Plane,
            110 => Self::Line,
            116 => Self::Point,
            118 => Self::RuledSurface,
            120 => Self::SurfaceOfRevolution,
            126 => Self::RationalBSplineCurve,
            128 => Self::RationalBSplineSurface,
            141 => Self::Boundary,
            142 => Self::CurveOnSurface,
            143 => Self::BoundedSurface,
            144 => Self::TrimmedSurface,
            _ => return None,
        })
    }

    /// Default directory-entry label (at most 8 characters).
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::CompositeCurve => "COMPCRV",
            Self::Plane => "PLANE",
            Self::Line => "LINE",
            Self::Point => "POINT",
            Self::RuledSurface => "RULEDSRF",
            Self::SurfaceOfRevolution => "REVSRF",
            Self::RationalBSplineCurve => "BSPLCRV",
            Self::RationalBSplineSurface => "BSPLSRF",
            Self::Boundary => "BOUNDARY",
            Self::CurveOnSurface => "CRVONSRF",
            Self::BoundedSurface => "BDDSRF",
            Self::TrimmedSurface => "TRIMSRF",
        }
    }
}

/// One parameter-data value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Real(f64),
    /// Reference to another entity of the same model; resolved to its
    /// directory-entry pointer on output.
    Pointer(EntityId),
    /// Hollerith string.
    Str(String),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for Param {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<EntityId> for Param {
    fn from(id: EntityId) -> Self {
        Self::Pointer(id)
    }
}

/// Directory-entry fields other than the section pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAttributes {
    pub structure: i32,
    pub line_font: i32,
    pub level: i32,
    pub view: i32,
    pub transform: i32,
    pub label_display: i32,
    /// Eight status digits: blank, subordinate, use, hierarchy.
    pub status: String,
    pub line_weight: i32,
    pub color: i32,
    pub form: i32,
    pub label: String,
    pub subscript: i32,
}

impl DirectoryAttributes {
    /// Defaults for an entity of `entity_type`.
    #[must_use]
    pub fn for_type(entity_type: EntityType) -> Self {
        Self {
            structure: 0,
            line_font: 0,
            level: 0,
            view: 0,
            transform: 0,
            label_display: 0,
            status: "00000000".into(),
            line_weight: 0,
            color: 0,
            form: 0,
            label: entity_type.mnemonic().into(),
            subscript: 0,
        }
    }
}

/// A typed IGES entity with its parameter data.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub entity_type: EntityType,
    pub params: Vec<Param>,
    pub attributes: DirectoryAttributes,
}

impl Entity {
    /// Creates an entity with default directory attributes.
    #[must_use]
    pub fn new(entity_type: EntityType, params: Vec<Param>) -> Self {
        Self {
            entity_type,
            params,
            attributes: DirectoryAttributes::for_type(entity_type),
        }
    }

    /// Sets the form number and returns the entity.
    #[must_use]
    pub fn with_form(mut self, form: i32) -> Self {
        self.attributes.form = form;
        self
    }

    /// Entities this one points at, in parameter order.
    pub fn references(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.params.iter().filter_map(|p| match p {
            Param::Pointer(id) => Some(*id),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in [102, 110, 116, 118, 120, 126, 128, 141, 142, 143, 144] {
            let t = EntityType::from_code(code);
            assert_eq!(t.map(EntityType::code), Some(code));
        }
        assert!(EntityType::from_code(314).is_none());
    }

    #[test]
    fn mnemonics_fit_directory_field() {
        for code in [102, 110, 116, 118, 120, 126, 128, 141, 142, 143, 144] {
            if let Some(t) = EntityType::from_code(code) {
                assert!(t.mnemonic().len() <= 8);
            }
        }
    }

    #[test]
    fn default_attributes() {
        let e = Entity::new(EntityType::Line, vec![Param::Real(0.0)]);
        assert_eq!(e.attributes.status, "00000000");
        assert_eq!(e.attributes.label, "LINE");
        assert_eq!(e.references().count(), 0);
    }
}

//! IGES 5.3 export of curves and surfaces, plus a reader for the parameter
//! data of the entities written here.
//!
//! Geometry is converted into an [`IgesModel`] arena with [`ToIges`]; the
//! [`IgesWriter`] then assigns directory pointers in insertion order and lays
//! out the fixed-column file.

mod convert;
mod entity;
mod model;
mod reader;
mod settings;
mod writer;

pub use convert::ToIges;
pub use entity::{DirectoryAttributes, Entity, EntityType, Param};
pub use model::{EntityId, IgesModel};
pub use reader::{entity_census, read_entities, ParsedEntity};
pub use settings::IgesSettings;
pub use writer::IgesWriter;

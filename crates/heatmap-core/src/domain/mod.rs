//! 테마 히트맵 도메인 모델.

mod records;
mod sector_mapping;
mod statistics;
mod stock;
mod theme;
mod treemap;
mod value_objects;

pub use records::*;
pub use sector_mapping::*;
pub use statistics::*;
pub use stock::*;
pub use theme::*;
pub use treemap::*;
pub use value_objects::*;

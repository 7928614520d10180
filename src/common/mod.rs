mod polygon;
mod svg;

pub(crate) use polygon::*;
pub(crate) use svg::*;

mod make_planar_fill;

pub use make_planar_fill::MakePlanarFill;

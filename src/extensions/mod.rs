//! Extension points supplied by application code: primitives, custom series
//! views and marker derivation.

pub mod custom_series;
pub mod markers;
pub mod primitives;

pub use custom_series::{CustomSeriesView, SeriesDefinition};
pub use markers::{
    MarkerFn, MarkerPosition, MarkerShape, SeriesMarker, no_markers, sort_markers,
    validate_markers,
};
pub use primitives::{
    AttachedParams, Primitive, PrimitiveCallbacks, PrimitiveList, PrimitiveListCallback,
    PrimitiveRef, PrimitiveTarget, empty_primitive_list, primitive_list, same_list,
    same_primitive,
};

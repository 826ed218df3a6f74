mod iter;
pub use iter::*;

mod sequence;
pub use sequence::*;

mod association;
pub use association::*;

mod numeric;
pub use numeric::*;

mod enumeration;
pub use enumeration::*;

/// Shape of a container type.
#[derive(Clone, Copy, Debug)]
pub enum ContainerDef {
    /// Ordered elements: lists, deques, linked lists.
    Sequence(SequenceDef),

    /// Key/value pairs: maps.
    Association(AssociationDef),
}

/// Cost of asking a container for its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeCost {
    /// The length is stored.
    Constant,
    /// The length is computed by walking the container.
    Linear,
}

bitflags::bitflags! {
    /// Properties of a type that decide how a container may store and copy it.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// Creating a value runs code (no all-zero default).
        const NEEDS_CONSTRUCTION = 1 << 0;
        /// Dropping a value runs code.
        const NEEDS_DESTRUCTION = 1 << 1;
        /// Copying a value runs code (not a bitwise copy).
        const NEEDS_COPY_CONSTRUCTION = 1 << 2;
        /// Moving a value runs code. Never set for plain Rust types.
        const NEEDS_MOVE_CONSTRUCTION = 1 << 3;
        /// A value may be moved with a bitwise copy.
        const RELOCATABLE = 1 << 4;
        /// The type is a pointer or handle.
        const IS_POINTER = 1 << 5;
        /// The type is an enumeration with named keys.
        const IS_ENUMERATION = 1 << 6;
        /// The type is a pointer to a class instance.
        const POINTER_TO_OBJECT = 1 << 7;
        /// The type exposes named fields.
        const IS_GADGET = 1 << 8;
        /// The enumeration's representation is unsigned.
        const IS_UNSIGNED_ENUMERATION = 1 << 9;
    }
}

bitflags::bitflags! {
    /// How far an iterator over a container can move.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct IterCapabilities: u8 {
        /// Forward traversal.
        const FORWARD = 1 << 0;
        /// Traversal from the back.
        const BIDIRECTIONAL = 1 << 1;
        /// Indexed access in constant time.
        const RANDOM_ACCESS = 1 << 2;
    }
}

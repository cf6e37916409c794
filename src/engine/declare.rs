//! # World Declaration Macro
//!
//! [`world!`](crate::world) is the build-time specialiser: it consumes the
//! component set of an application and emits a concrete world type wired
//! into the generic runtime.
//!
//! ## What gets generated
//!
//! For an invocation declaring records `R1 … Rn`:
//!
//! - each record type, deriving `Clone + Copy + Debug + Default + PartialEq`;
//! - a [`ComponentId`](crate::ComponentId) per record, assigned by
//!   declaration order across data and relationship kinds alike;
//! - the world struct: entity table, one [`Column`](crate::Column) per data
//!   kind, one [`RelationTable`](crate::RelationTable) per relationship
//!   kind, and the system list;
//! - implementations of [`World`](crate::World),
//!   [`ComponentStore`](crate::ComponentStore), and
//!   [`RelationStore`](crate::RelationStore), including the generated
//!   cleanup routines that visit every column and table;
//! - `MAX_ENTITIES`, `new()`, and `Default`.
//!
//! ## Classification
//!
//! A record whose **first field is `relationship: Relationship`** is a
//! relationship kind; its remaining fields become edge data. Every other
//! record is a data kind stored in a dense column. This mirrors the record
//! convention of the wider system: nothing about a kind is declared twice.
//!
//! ## Failure modes
//!
//! Misdeclarations abort compilation: record bodies that do not parse as
//! plain named fields are rejected by the macro grammar, a zero capacity or
//! a component set larger than [`COMPONENT_CAP`](crate::COMPONENT_CAP)
//! trips a const assertion. Nothing is deferred to run time. Generated code
//! uses fully-qualified paths throughout, so it never suffers unused or
//! missing imports.
//!
//! The field names `table` and `systems` are reserved for the generated
//! world struct.

/// Declares a specialised world type over a fixed component set.
///
/// ## Syntax
///
/// ```text
/// world! {
///     pub struct MyWorld(max_entities = CAPACITY) {
///         field_name: RecordName { field: Type, … },
///         …
///     }
/// }
/// ```
///
/// Each entry names the world's storage field and defines the record stored
/// in it. A record whose first field is `relationship: Relationship` is a
/// relationship kind; the rest are data kinds.
///
/// ## Example
///
/// ```rust
/// use colony_ecs::{Relationship, World};
///
/// colony_ecs::world! {
///     /// World for a small herding simulation.
///     pub struct Sim(max_entities = 1024) {
///         position: Position { x: i32, y: i32 },
///         health: Health { value: i32 },
///         likes: Likes { relationship: Relationship },
///     }
/// }
///
/// let mut world = Sim::new();
/// let dog = world.spawn();
/// dog.set(Position { x: 3, y: 4 });
/// dog.set(Health { value: 30 });
/// let dog = dog.entity_ref();
///
/// world.select(|_e, health: &mut Health, position: &mut Position| {
///     position.x += 1;
///     health.value -= 1;
/// });
///
/// assert_eq!(world.read::<Health>(dog).value, 29);
/// assert_eq!(world.read::<Position>(dog).x, 4);
/// ```
#[macro_export]
macro_rules! world {
    (
        $(#[$wmeta:meta])*
        $vis:vis struct $World:ident (max_entities = $cap:expr) {
            $($body:tt)*
        }
    ) => {
        $crate::__world!(@step
            [$(#[$wmeta])*] [$vis] [$World] [$cap]
            counter = []
            data = []
            rels = []
            rest = [$($body)*]
        );
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __world {
    // Relationship kind: first field is the `Relationship` marker.
    (@step
        [$($wmeta:tt)*] [$vis:vis] [$World:ident] [$cap:expr]
        counter = [$($counter:tt)*]
        data = [$($data:tt)*]
        rels = [$($rels:tt)*]
        rest = [
            $(#[$cmeta:meta])*
            $field:ident : $Record:ident { relationship: Relationship $(, $fname:ident : $fty:ty)* $(,)? }
            $(, $($rest:tt)*)?
        ]
    ) => {
        $(#[$cmeta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        $vis struct $Record {
            /// Marker field classifying this record as a relationship.
            pub relationship: $crate::Relationship,
            $(pub $fname: $fty,)*
        }

        impl $crate::Relation for $Record {
            const ID: $crate::ComponentId =
                $crate::ComponentId($crate::__count!($($counter)*));
        }

        $crate::__world!(@step
            [$($wmeta)*] [$vis] [$World] [$cap]
            counter = [$($counter)* @]
            data = [$($data)*]
            rels = [$($rels)* [$field $Record]]
            rest = [$($($rest)*)?]
        );
    };

    // Data kind: any other plain record.
    (@step
        [$($wmeta:tt)*] [$vis:vis] [$World:ident] [$cap:expr]
        counter = [$($counter:tt)*]
        data = [$($data:tt)*]
        rels = [$($rels:tt)*]
        rest = [
            $(#[$cmeta:meta])*
            $field:ident : $Record:ident { $($fname:ident : $fty:ty),* $(,)? }
            $(, $($rest:tt)*)?
        ]
    ) => {
        $(#[$cmeta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        $vis struct $Record {
            $(pub $fname: $fty,)*
        }

        impl $crate::Component for $Record {
            const ID: $crate::ComponentId =
                $crate::ComponentId($crate::__count!($($counter)*));
        }

        $crate::__world!(@step
            [$($wmeta)*] [$vis] [$World] [$cap]
            counter = [$($counter)* @]
            data = [$($data)* [$field $Record]]
            rels = [$($rels)*]
            rest = [$($($rest)*)?]
        );
    };

    // Terminal: every record consumed; emit the world type.
    (@step
        [$($wmeta:tt)*] [$vis:vis] [$World:ident] [$cap:expr]
        counter = [$($counter:tt)*]
        data = [$([$dfield:ident $DRecord:ident])*]
        rels = [$([$rfield:ident $RRecord:ident])*]
        rest = []
    ) => {
        $($wmeta)*
        $vis struct $World {
            table: $crate::EntityTable,
            systems: $crate::SystemList<Self>,
            $($dfield: $crate::Column<$DRecord>,)*
            $($rfield: $crate::RelationTable<$RRecord>,)*
        }

        impl $World {
            /// Fixed entity capacity of this world.
            $vis const MAX_ENTITIES: usize = $cap;

            /// Creates an empty world at full capacity.
            $vis fn new() -> Self {
                Self {
                    table: $crate::EntityTable::new(Self::MAX_ENTITIES),
                    systems: $crate::SystemList::default(),
                    $($dfield: $crate::Column::new(Self::MAX_ENTITIES),)*
                    $($rfield: $crate::RelationTable::default(),)*
                }
            }
        }

        impl ::core::default::Default for $World {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::World for $World {
            fn table(&self) -> &$crate::EntityTable {
                &self.table
            }

            fn table_mut(&mut self) -> &mut $crate::EntityTable {
                &mut self.table
            }

            unsafe fn table_raw(world: *mut Self) -> *mut $crate::EntityTable {
                unsafe { ::core::ptr::addr_of_mut!((*world).table) }
            }

            fn systems(&self) -> &$crate::SystemList<Self> {
                &self.systems
            }

            fn systems_mut(&mut self) -> &mut $crate::SystemList<Self> {
                &mut self.systems
            }

            fn clear_storage(&mut self) {
                $(self.$dfield.reset();)*
                $(self.$rfield.clear();)*
            }

            unsafe fn purge_raw(world: *mut Self, index: $crate::EntityIndex) {
                unsafe {
                    let table = <Self as $crate::World>::table_raw(world);
                    $(
                        let emptied =
                            (*::core::ptr::addr_of_mut!((*world).$rfield)).purge(index);
                        for source in emptied {
                            (*table)
                                .slot_mut(source)
                                .mask
                                .clear(<$RRecord as $crate::Relation>::ID);
                        }
                    )*
                    (*table).slot_mut(index).mask = $crate::ComponentMask::EMPTY;
                }
            }
        }

        $(
            impl $crate::ComponentStore<$DRecord> for $World {
                fn column(&self) -> &$crate::Column<$DRecord> {
                    &self.$dfield
                }

                fn column_mut(&mut self) -> &mut $crate::Column<$DRecord> {
                    &mut self.$dfield
                }

                unsafe fn column_raw(world: *mut Self) -> *mut $crate::Column<$DRecord> {
                    unsafe { ::core::ptr::addr_of_mut!((*world).$dfield) }
                }
            }
        )*

        $(
            impl $crate::RelationStore<$RRecord> for $World {
                fn relation(&self) -> &$crate::RelationTable<$RRecord> {
                    &self.$rfield
                }

                fn relation_mut(&mut self) -> &mut $crate::RelationTable<$RRecord> {
                    &mut self.$rfield
                }

                unsafe fn relation_raw(world: *mut Self) -> *mut $crate::RelationTable<$RRecord> {
                    unsafe { ::core::ptr::addr_of_mut!((*world).$rfield) }
                }
            }
        )*

        const _: () = {
            ::core::assert!($cap > 0, "a world needs at least one entity slot");
            ::core::assert!(
                ($crate::__count!($($counter)*) as usize) <= $crate::COMPONENT_CAP,
                "component set exceeds COMPONENT_CAP"
            );
        };
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __count {
    () => { 0u16 };
    (@ $($rest:tt)*) => { 1u16 + $crate::__count!($($rest)*) };
}

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! The backtracking dependency resolver: the constraint algebra
//! ([`Group`], [`Constraint`]), the search graph ([`Graph`], [`Dependency`]),
//! the search itself ([`Mutator`], [`Resolver`]), and the flat projection
//! consumed by converters ([`Requirement`]).

pub mod conflict;
pub mod constraint;
pub mod declaration;
pub mod dependency;
pub mod graph;
pub mod group;
pub mod mutator;
pub mod release;
pub mod repository;
pub mod requirement;
pub mod resolver;

pub use conflict::ConflictAnalyzer;
pub use constraint::Constraint;
pub use declaration::{Declaration, VcsKind};
pub use dependency::{Author, DeclaredDependency, Dependency, RootDependency};
pub use graph::{Graph, GraphNode};
pub use group::Group;
pub use mutator::Mutator;
pub use release::{GitRelease, Origin, Release};
pub use repository::Repository;
pub use requirement::Requirement;
pub use resolver::{CancellationToken, Resolver};

pub use vellum_core::Specifier;

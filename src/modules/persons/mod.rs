pub mod controller;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod repository;
pub mod router;

pub use memory::InMemoryPersonRepository;
pub use model::*;
pub use postgres::PgPersonRepository;
pub use repository::PersonRepository;
pub use router::init_persons_router;

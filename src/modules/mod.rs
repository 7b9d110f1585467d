pub mod persons;

pub use self::persons::model::Person;

mod races;
pub use races::Races;

use uuid::Uuid;

/// Port for event and client order identifier generation
pub trait UuidFactory: Send + Sync {
    fn generate(&self) -> Uuid;
}

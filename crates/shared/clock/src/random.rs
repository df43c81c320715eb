use kestrel_ports::UuidFactory;
use uuid::Uuid;

/// Random (v4) UUID source
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuidFactory;

impl UuidFactory for RandomUuidFactory {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_distinct_v4() {
        let factory = RandomUuidFactory;
        let a = factory.generate();
        let b = factory.generate();
        assert_ne!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }
}

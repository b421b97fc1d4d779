use crate::error::Error;
use std::sync::{LazyLock, Mutex};
use ulid::Generator;

///
/// GENERATOR is lazily initiated with a Mutex
/// it has to keep state to make sure id order follows creation order
///

static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Generate a fresh entity id using the global monotonic generator.
pub(crate) fn generate() -> Result<String, Error> {
    let mut generator = GENERATOR
        .lock()
        .map_err(|_| Error::LockPoisoned("id generator".to_string()))?;

    generator
        .generate()
        .map(|ulid| ulid.to_string())
        .map_err(|err| Error::IdGeneration(err.to_string()))
}

///
/// TESTS
///

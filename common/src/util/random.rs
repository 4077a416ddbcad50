use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Length of generated identifiers and temp directory names.
pub const ID_LENGTH: usize = 30;

pub fn generate_id() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(ID_LENGTH).map(char::from).collect()
}

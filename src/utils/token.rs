use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub const SESSION_ID_LENGTH: usize = 48;

pub fn generate_session_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

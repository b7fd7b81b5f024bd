use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
pub struct Payload {
    pub repository: Repository,
}

#[derive(Deserialize, Serialize)]
pub struct Repository {
    pub name: String,
}

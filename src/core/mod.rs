// Domain-layer modules and shared errors/models
pub mod location {
    pub use crate::location::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod mock {
    pub use crate::mock::*;
}

pub mod export {
    pub use crate::export::*;
}

pub mod lead_search {
    pub use crate::lead_search::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}

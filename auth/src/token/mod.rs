pub mod claims;
pub mod codec;
pub mod errors;
pub mod pair;

pub use claims::SessionClaims;
pub use codec::TokenCodec;
pub use errors::TokenError;
pub use pair::TokenPair;
pub use pair::TokenPairIssuer;
pub use pair::ACCESS_TOKEN_TTL;
pub use pair::REFRESH_TOKEN_TTL;

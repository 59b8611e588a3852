pub mod login;

pub use login::{AuthenticationResponseDto, LoginRequestDto, TokenDto};

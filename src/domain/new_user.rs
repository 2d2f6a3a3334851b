use super::{UserEmail, Username};

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: Username,
    pub email: UserEmail,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub email_verified: bool,
}

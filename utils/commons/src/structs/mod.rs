use super::*;

mod approval;
mod token;

pub use self::{approval::*, token::*};

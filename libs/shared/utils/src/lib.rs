pub mod cpf;
pub mod dates;

pub(crate) mod decode;
pub(crate) mod embedded;
pub(crate) mod encode;
pub(crate) mod text;

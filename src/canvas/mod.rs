pub(crate) mod coords;
pub(crate) mod mask;
pub(crate) mod stroke;

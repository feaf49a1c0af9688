pub mod descriptor;
pub mod expr;
pub mod store;
pub mod value;

pub use descriptor::{Callable, Convention, FunctionDescriptor, HostFn, ParamRef, ParametrizedDescriptor};
pub use expr::{Binding, Expr, Ident, Literal, Pattern};
pub use store::ReactiveStore;
pub use value::{options_to_expr, OptionValue, OptionsMap};

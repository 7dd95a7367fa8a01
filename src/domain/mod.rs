mod aggregate;
mod aging;
mod menu;
mod money;
mod payroll;
mod period;
mod pnl;
mod record;
mod tax;

pub use aggregate::*;
pub use aging::*;
pub use menu::*;
pub use money::*;
pub use payroll::*;
pub use period::*;
pub use pnl::*;
pub use record::*;
pub use tax::*;

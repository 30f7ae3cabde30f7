/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod address;
pub mod ec2;
pub mod errors;
pub mod exclusion;
pub mod provider;
pub mod reporter;
pub mod results;
pub mod scanner;

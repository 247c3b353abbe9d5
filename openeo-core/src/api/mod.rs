/// Route catalog shared by the dispatcher and the capability registry
pub mod routes;

mod helpers;

mod catalog_test;
mod router_test;
mod search_test;
mod statistics_test;

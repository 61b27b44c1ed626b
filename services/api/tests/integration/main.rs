mod helpers;
mod post_test;
mod router_test;

pub mod assert_migrations;

pub mod archive_fixtures;

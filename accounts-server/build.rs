//! `sqlx::migrate!` embeds the migrations at compile time, so cargo needs to
//! know to rebuild when they change.
fn main() {
    println!("cargo:rerun-if-changed=migrations");
}

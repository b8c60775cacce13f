fn main() {
    jnd_pipeline::cli::run();
}

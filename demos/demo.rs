use sanfig::ConfigStore;

fn main() {
    env_logger::init();

    // lands next to the binary, in ./config/demo.sanfig
    let store = ConfigStore::new("demo");
    println!("config file: {}", store.path().display());

    store.safe_write("greeting", "hello");
    store.safe_write("launches", "0");

    let launches = store.safe_read_int("launches") + 1;
    store.write("launches", &launches.to_string());

    println!("{} (launch #{})", store.safe_read("greeting"), launches);
    println!("verbose: {}", store.safe_read_bool("verbose"));
}

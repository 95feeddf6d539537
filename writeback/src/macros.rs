#[cfg(test)]
#[macro_export]
macro_rules! async_test {
    ($(async fn $name:ident () $body:block)+) => {
        $(
            paste::paste! {
                #[tokio::test(flavor = "current_thread")]
                async fn [<$name _ st>] () $body

                #[tokio::test(flavor = "multi_thread")]
                async fn [<$name _ mt>] () $body
            }
        )+
    };
}

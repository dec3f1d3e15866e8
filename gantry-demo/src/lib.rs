#![feature(const_type_name)]
// Demo components: a greeting service behind a trait and a calculator
// controller wired to it.

pub mod services {
    use gantry::register_service;

    pub trait IGreetingService: Send + Sync {
        fn greet(&self, name: &str) -> String;
    }

    #[derive(Default)]
    pub struct GreetingService;

    impl IGreetingService for GreetingService {
        fn greet(&self, name: &str) -> String {
            format!("Hello, {name}!")
        }
    }

    register_service!(GreetingService, implements: [IGreetingService]);
}

pub mod web {
    use crate::services::IGreetingService;
    use gantry::{
        register_controller, register_inject, register_route, Error, Inject, RequestContext,
        ResponseSink,
    };

    #[derive(Default)]
    pub struct DemoController {
        greeting: Inject<dyn IGreetingService>,
    }

    impl DemoController {
        pub fn query(
            &self,
            _ctx: &RequestContext,
            sink: &mut ResponseSink,
            name: String,
        ) -> Result<(), Error> {
            let greeting = self.greeting.get()?;
            sink.write(greeting.greet(&name));
            Ok(())
        }

        pub fn add(
            &self,
            _ctx: &RequestContext,
            sink: &mut ResponseSink,
            a: i64,
            b: i64,
        ) -> Result<(), Error> {
            sink.write(format!("{a}+{b}={}", a + b));
            Ok(())
        }

        // Accepts the request and answers nothing, like a fire-and-forget
        // deletion endpoint.
        pub fn remove(
            &self,
            _ctx: &RequestContext,
            _sink: &mut ResponseSink,
            _id: i64,
        ) -> Result<(), Error> {
            Ok(())
        }
    }

    register_controller!(DemoController, base_path: "/demo");
    register_inject!(DemoController, greeting: dyn IGreetingService);
    register_route!(DemoController, query, "/query.json", (ctx, sink, name: str));
    register_route!(DemoController, add, "/add.json", (ctx, sink, a: int, b: int));
    register_route!(DemoController, remove, "/remove.json", (ctx, sink, id: int));
}

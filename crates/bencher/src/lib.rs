/// A route table to benchmark matching against, and the paths looked up in it
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    table: RouteTable,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, table: RouteTable) -> Self {
        Self { name, group, table }
    }

    pub fn small(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Small, table)
    }

    pub fn normal(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Normal, table)
    }

    pub fn large(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Large, table)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

/// `(method, template)` pairs in registration order, plus `(method, path)` lookups
#[derive(Debug, Copy, Clone)]
pub struct RouteTable {
    routes: &'static [(&'static str, &'static str)],
    lookups: &'static [(&'static str, &'static str)],
}

impl RouteTable {
    pub const fn new(routes: &'static [(&'static str, &'static str)], lookups: &'static [(&'static str, &'static str)]) -> Self {
        Self { routes, lookups }
    }

    pub fn routes(&self) -> &'static [(&'static str, &'static str)] {
        self.routes
    }

    pub fn lookups(&self) -> &'static [(&'static str, &'static str)] {
        self.lookups
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

/// A raw request fed to the request decoder
#[derive(Debug, Copy, Clone)]
pub struct TestRequest {
    name: &'static str,
    content: &'static str,
}

impl TestRequest {
    pub const fn new(name: &'static str, content: &'static str) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn content(&self) -> &'static str {
        self.content
    }
}

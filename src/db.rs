pub mod grant_store;
pub use grant_store::GrantStore;
pub mod sharing_repo;
pub use sharing_repo::SharingRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;

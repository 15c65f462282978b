use posture_core::{CreateTenantRequest, M365Credentials};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Domain,
    ClientId,
    ClientSecret,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Tenant name",
            Field::Domain => "Primary domain",
            Field::ClientId => "Microsoft 365 client id",
            Field::ClientSecret => "Microsoft 365 client secret",
        }
    }

    pub fn all() -> [Field; 4] {
        [Field::Name, Field::Domain, Field::ClientId, Field::ClientSecret]
    }
}

/// Input state of the new tenant dialog
#[derive(Debug, Default, Clone)]
pub struct NewTenantForm {
    pub name: String,
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub focus: usize,
}

impl NewTenantForm {
    pub fn focused(&self) -> Field {
        Field::all()[self.focus % Field::all().len()]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Field::all().len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + Field::all().len() - 1) % Field::all().len();
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.focused() {
            Field::Name => &mut self.name,
            Field::Domain => &mut self.domain,
            Field::ClientId => &mut self.client_id,
            Field::ClientSecret => &mut self.client_secret,
        }
    }

    pub fn push(&mut self, c: char) {
        self.buffer_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.buffer_mut().pop();
    }

    /// Text shown for `field`; the secret is masked.
    pub fn display(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Domain => self.domain.clone(),
            Field::ClientId => self.client_id.clone(),
            Field::ClientSecret => "*".repeat(self.client_secret.chars().count()),
        }
    }

    pub fn to_requests(&self) -> (CreateTenantRequest, M365Credentials) {
        (
            CreateTenantRequest::new(&self.name, &self.domain),
            M365Credentials {
                client_id: self.client_id.trim().to_string(),
                client_secret: self.client_secret.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = NewTenantForm::default();
        "Contoso".chars().for_each(|c| form.push(c));
        form.next_field();
        "contoso.com".chars().for_each(|c| form.push(c));
        form.pop();

        assert_eq!(form.name, "Contoso");
        assert_eq!(form.domain, "contoso.co");
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = NewTenantForm::default();
        form.prev_field();
        assert_eq!(form.focused(), Field::ClientSecret);
        form.next_field();
        assert_eq!(form.focused(), Field::Name);
    }

    #[test]
    fn test_secret_is_masked() {
        let form = NewTenantForm {
            client_secret: "hunter2".into(),
            ..Default::default()
        };
        assert_eq!(form.display(Field::ClientSecret), "*******");
    }

    #[test]
    fn test_requests_are_normalised() {
        let form = NewTenantForm {
            name: " Contoso ".into(),
            domain: "Contoso.COM".into(),
            client_id: " app-1 ".into(),
            client_secret: "s3cret".into(),
            focus: 0,
        };
        let (request, creds) = form.to_requests();
        assert_eq!(request.domain, "contoso.com");
        assert_eq!(request.name, "Contoso");
        assert_eq!(creds.client_id, "app-1");
    }
}
